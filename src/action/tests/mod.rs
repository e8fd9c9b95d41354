mod tests_orbit;
