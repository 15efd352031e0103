pub mod append;
pub mod cat;
pub mod check;

use std::fs::File;
use std::io::{self, BufReader, Read};

/// Opens `path` for reading, or stdin when no path is given.
pub fn open_input(path: Option<&str>) -> Result<Box<dyn Read>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let file = File::open(path).map_err(|e| format!("Failed to open {}: {}", path, e))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin())),
    }
}
