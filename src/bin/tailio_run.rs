use std::env;
use std::fs::File;
use std::io::{BufReader, Write};
use std::thread;
use std::time::Duration;

use tailio::config::PipelineConfig;
use tailio::filter::default_registry;
use tailio::{FileProvider, PipelineBuilder};

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let (config_path, input_path) = match (args.next(), args.next()) {
        (Some(config), Some(input)) => (config, input),
        _ => {
            eprintln!("Usage: tailio_run <pipeline.yaml> <input-file> [checkpoint]");
            std::process::exit(1);
        }
    };
    let checkpoint = args.next().map(|raw| raw.parse::<u64>()).transpose()?;

    let file = File::open(&config_path)?;
    let config: PipelineConfig = serde_yaml::from_reader(BufReader::new(file))?;

    let provider = FileProvider::new(input_path);
    let mut engine =
        PipelineBuilder::from_pipeline_config(config, default_registry())?.open(&provider, checkpoint)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    loop {
        let batch = engine.poll()?;
        for record in &batch.records {
            writeln!(out, "{}", serde_json::to_string(record)?)?;
        }
        for failure in &batch.failures {
            eprintln!("[{}] {:?}: {}", failure.stage, failure.span, failure.error);
        }
        if batch.last {
            break;
        }
        if batch.records.is_empty() && engine.is_following() {
            thread::sleep(Duration::from_millis(250));
        }
    }
    out.flush()?;

    eprintln!("checkpoint: {}", engine.position());
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("tailio_run error: {e}");
        std::process::exit(1);
    }
}
