mod tests_alphabet;
mod tests_orders;
