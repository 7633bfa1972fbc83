//! CLI tool for gridview - reads an XLSX export back into rows as JSON
//!
//! Usage:
//!   gridview_cli <input.xlsx>              # Output JSON rows to stdout
//!   gridview_cli <input.xlsx> -o out.json  # Output JSON rows to file
//!
//! The first worksheet's header row becomes the row keys; every data
//! row becomes one JSON object.

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;
use std::io::{self, Write};

use gridview::workbook::read_rows;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: gridview_cli <input.xlsx> [-o output.json]");
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = if args.len() > 3 && args[2] == "-o" {
        Some(&args[3])
    } else {
        None
    };

    let data = match fs::read(input_path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error reading {}: {}", input_path, e);
            std::process::exit(1);
        }
    };

    let (_headers, rows) = match read_rows(&data) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error parsing XLSX: {}", e);
            std::process::exit(1);
        }
    };

    let json = match serde_json::to_string_pretty(&rows) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error serializing JSON: {}", e);
            std::process::exit(1);
        }
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                eprintln!("Error writing {}: {}", path, e);
                std::process::exit(1);
            }
            eprintln!("Written: {}", path);
        }
        None => {
            io::stdout().write_all(json.as_bytes()).unwrap();
            println!();
        }
    }
}
