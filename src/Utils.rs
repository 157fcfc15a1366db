/// loaders of IV curve and datasheet task files
pub mod load_from_file;
/// terminal logger of the binary
pub mod logger;
