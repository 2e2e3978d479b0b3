//! GOCAD CLI - Tool for inspecting GOCAD ASCII surface files.

use gocad::geom::{build_geometries, GeometryOptions};
use gocad::gocad::{decode_tsurf_with, DecoderOptions};
use gocad::{Series, Table};
use rayon::prelude::*;
use serde_json::json;
use std::env;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, trace};
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const BUILD_DATE: &str = env!("GOCAD_BUILD_DATE");
const BUILD_TIME: &str = env!("GOCAD_BUILD_TIME");

/// Flags shared by every command.
#[derive(Default)]
struct Flags {
    json: bool,
    center: bool,
    options: DecoderOptions,
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = "info";
    let mut flags = Flags::default();
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "off",
            "-j" | "--json" => flags.json = true,
            "-c" | "--center" => flags.center = true,
            "--local" => flags.options = DecoderOptions::local(),
            _ => filtered_args.push(arg),
        }
    }
    if flags.json {
        level = "off";
    }
    init_tracing(level);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    match filtered_args[0] {
        // Info command - one line per object
        "info" | "i" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: gocad info <file.ts>");
                std::process::exit(1);
            }
            cmd_info(filtered_args[1], &flags);
        }

        // Dump command - columns and values
        "dump" | "d" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: gocad dump <file.ts> [object] [--json]");
                std::process::exit(1);
            }
            cmd_dump(filtered_args[1], filtered_args.get(2).copied(), &flags);
        }

        // Stats command - geometry statistics over several files
        "stats" | "s" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: gocad stats <file.ts>... [--center]");
                std::process::exit(1);
            }
            cmd_stats(&filtered_args[1..], &flags);
        }

        "version" | "-V" | "--version" => {
            println!("gocad {} (built {} {})", VERSION, BUILD_DATE, BUILD_TIME);
        }

        // Help
        "help" | "h" | "-h" | "--help" => print_help(),

        // Default: if file exists, show info; otherwise error
        _ => {
            if Path::new(filtered_args[0]).exists() {
                cmd_info(filtered_args[0], &flags);
            } else {
                eprintln!("Unknown command: {}", filtered_args[0]);
                eprintln!();
                print_help();
                std::process::exit(1);
            }
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_env("GOCAD_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_help() {
    println!("gocad - GOCAD ASCII surface toolkit");
    println!();
    println!("USAGE:");
    println!("    gocad [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info   <file>              Show objects, vertex and face counts");
    println!("    d, dump   <file> [object]     Dump columns of all objects (or one by name)");
    println!("    s, stats  <file>...           Decode files in parallel and show bounds");
    println!("    version                       Show version and build date");
    println!("    h, help                       Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Suppress log output");
    println!("    -j, --json       Print JSON instead of text (dump)");
    println!("    -c, --center     Recenter geometries on their common center (stats)");
    println!("    --local          Allocate buffers without shared memory");
    println!();
    println!("ENVIRONMENT:");
    println!("    GOCAD_LOG        Log filter, overrides -v/-q (e.g. gocad=trace)");
    println!();
    println!("EXAMPLES:");
    println!("    gocad info horizon.ts             # Quick overview");
    println!("    gocad dump horizon.ts top         # Columns of object 'top'");
    println!("    gocad dump horizon.ts --json      # Everything as JSON");
    println!("    gocad stats a.ts b.ts --center    # Bounds after recentering");
}

/// Read and decode one file, exiting on failure.
fn load(path: &str, flags: &Flags) -> Vec<Table> {
    match try_load(path, flags) {
        Ok(tables) => tables,
        Err(e) => {
            eprintln!("Failed to decode {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

fn try_load(path: &str, flags: &Flags) -> Result<Vec<Table>, String> {
    info!("Reading {}", path);
    let start = Instant::now();
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let tables = decode_tsurf_with(&text, &flags.options).map_err(|e| e.to_string())?;
    debug!(
        "Decoded {} objects from {} bytes in {:.2?}",
        tables.len(),
        text.len(),
        start.elapsed()
    );
    Ok(tables)
}

fn cmd_info(path: &str, flags: &Flags) {
    let tables = load(path, flags);

    println!("File: {}", path);
    println!("Objects: {}", tables.len());
    println!();

    let mut total_vertices = 0;
    let mut total_faces = 0;
    for (i, table) in tables.iter().enumerate() {
        let index_kind = table
            .indices()
            .map(|s| s.kind().to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  [{}] {} ({}): {} vertices, {} faces, indices {}",
            i,
            table.name().unwrap_or("?"),
            table.user_data().class_name().unwrap_or("?"),
            table.vertex_count(),
            table.face_count(),
            index_kind
        );
        let attributes = table.user_data().attribute_names();
        if !attributes.is_empty() {
            println!("      properties: {}", attributes.join(", "));
        }
        total_vertices += table.vertex_count();
        total_faces += table.face_count();
    }
    println!();
    println!("Total: {} vertices, {} faces", total_vertices, total_faces);
}

fn cmd_dump(path: &str, pattern: Option<&str>, flags: &Flags) {
    let tables = load(path, flags);
    let selected: Vec<&Table> = tables
        .iter()
        .filter(|t| pattern.map_or(true, |p| t.name().is_some_and(|n| n.contains(p))))
        .collect();
    trace!("{} of {} objects selected", selected.len(), tables.len());

    if flags.json {
        let objects: Vec<_> = selected.iter().map(|t| table_json(t)).collect();
        match serde_json::to_string_pretty(&json!({ "file": path, "objects": objects })) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Failed to serialize: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    for table in selected {
        println!("Object: {}", table.name().unwrap_or("?"));
        for (key, value) in table.user_data().iter() {
            println!("  @{} = {}", key, value);
        }
        for (name, series) in table.iter() {
            println!(
                "  {}: {} x {} ({}{})",
                name,
                series.count(),
                series.item_size(),
                series.kind(),
                if series.is_shared() { ", shared" } else { "" }
            );
            print_items(series, 8);
        }
        println!();
    }
}

fn print_items(series: &Series, limit: usize) {
    for (i, item) in series.iter().take(limit).enumerate() {
        println!("    [{}] {:?}", i, item.as_slice());
    }
    if series.count() > limit {
        println!("    ... {} more", series.count() - limit);
    }
}

fn table_json(table: &Table) -> serde_json::Value {
    let columns: serde_json::Map<String, serde_json::Value> = table
        .iter()
        .map(|(name, series)| {
            (
                name.to_string(),
                json!({
                    "kind": series.kind().name(),
                    "itemSize": series.item_size(),
                    "count": series.count(),
                    "values": series.to_f64_vec(),
                }),
            )
        })
        .collect();
    json!({ "userData": table.user_data().to_json(), "columns": columns })
}

fn cmd_stats(paths: &[&str], flags: &Flags) {
    let start = Instant::now();
    let decoded: Vec<(&str, Result<Vec<Table>, String>)> = paths
        .par_iter()
        .map(|&p| (p, try_load(p, flags)))
        .collect();

    let mut tables = Vec::new();
    let mut failed = 0;
    for (path, result) in decoded {
        match result {
            Ok(t) => tables.extend(t),
            Err(e) => {
                eprintln!("Failed to decode {}: {}", path, e);
                failed += 1;
            }
        }
    }

    let options = GeometryOptions { center: flags.center };
    let geometries = match build_geometries(&tables, &options) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Failed to build geometry: {}", e);
            std::process::exit(1);
        }
    };

    println!("Files: {} ({} failed)", paths.len(), failed);
    println!("Objects: {}", geometries.len());
    println!();
    for g in &geometries {
        println!(
            "  {}: {} vertices, {} triangles",
            g.name,
            g.vertex_count(),
            g.triangle_count()
        );
        if !g.bounds.is_empty() {
            println!(
                "      bounds {:?} .. {:?}, radius {:.3}",
                g.bounds.min.to_array(),
                g.bounds.max.to_array(),
                g.bounding_radius()
            );
        }
    }
    println!();
    println!("Elapsed: {:.2?}", start.elapsed());

    if failed > 0 {
        std::process::exit(1);
    }
}
