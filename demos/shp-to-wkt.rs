extern crate shpwkt;

use std::env;
use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::process;
use shpwkt::read::shapefile;

/// Reads the given .shp file and prints one WKT geometry per line.
fn main() {
    let mut args = env::args();

    if args.len() != 2 {
        writeln!(&mut io::stderr(), "Usage: {} <SHP_PATH>", args.next().unwrap()).unwrap();
        process::exit(1);
    }

    args.next();
    let path = PathBuf::from(args.next().unwrap());

    match shapefile::open_windows1252(&path) {
        Err(err) => {
            writeln!(&mut io::stderr(), "{}", err).unwrap();
            process::exit(1);
        }
        Ok(reader) => {
            println!("# {} {} ({} bytes)", reader.header.shape_kind.name().unwrap_or("Unknown"), reader.header.crs, reader.header.file_n_bytes());

            let mut n_records: usize = 0;

            for record_result in reader {
                match record_result {
                    Err(err) => {
                        writeln!(&mut io::stderr(), "Error during read: {}", err).unwrap();
                        process::exit(1);
                    }
                    Ok(record) => {
                        n_records += 1;
                        println!("{}", record.geometry.text);
                    }
                }
            }

            println!("# Read {} records", n_records);
        }
    }
}
