mod tests_enumerate;
mod tests_standardize;
