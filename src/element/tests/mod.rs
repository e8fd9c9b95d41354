mod tests_bipartition;
mod tests_transf;
