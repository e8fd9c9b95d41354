mod tests_basic;
mod tests_examples;
mod tests_infinity;
