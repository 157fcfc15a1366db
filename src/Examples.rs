pub mod pv_examples;
