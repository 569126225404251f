//! CLI tool for extracting question/answer pairs from a PDF into CSV

use pdf_qa_extract::{csv, process_pdf, DiagnosticsDump, ExtractConfig};
use std::env;
use std::path::PathBuf;
use std::process;

const DEFAULT_OUTPUT: &str = "output_questions_answers.csv";

struct Args {
    pdf_path: String,
    output: String,
    config: ExtractConfig,
    dump_dir: Option<PathBuf>,
    sort: bool,
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <pdf_file> [output.csv] [options]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --workers N         parallel extraction workers (default 8)");
    eprintln!("  --start-page N      first page index to read (default 14)");
    eprintln!("  --checkpoints DIR   cache extracted pages in DIR");
    eprintln!("  --dump DIR          write the reconstructed text and records to DIR");
    eprintln!("  --sort              sort rows by chapter, then question number");
    process::exit(1);
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut positional = Vec::new();
    let mut config = ExtractConfig::default();
    let mut dump_dir = None;
    let mut sort = false;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("{} needs a value", flag))
        };
        match arg.as_str() {
            "--workers" => {
                config.workers = value("--workers")?
                    .parse()
                    .map_err(|e| format!("--workers: {}", e))?;
            }
            "--start-page" => {
                config.start_page = value("--start-page")?
                    .parse()
                    .map_err(|e| format!("--start-page: {}", e))?;
            }
            "--checkpoints" => config.checkpoint_dir = Some(PathBuf::from(value("--checkpoints")?)),
            "--dump" => dump_dir = Some(PathBuf::from(value("--dump")?)),
            "--sort" => sort = true,
            flag if flag.starts_with("--") => return Err(format!("unknown option {}", flag)),
            _ => positional.push(arg.clone()),
        }
    }

    let mut positional = positional.into_iter();
    let pdf_path = positional.next().ok_or("missing <pdf_file>")?;
    let output = positional.next().unwrap_or_else(|| DEFAULT_OUTPUT.to_string());

    Ok(Args {
        pdf_path,
        output,
        config,
        dump_dir,
        sort,
    })
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let argv: Vec<String> = env::args().collect();
    let program = argv.first().map(String::as_str).unwrap_or("pdf2qa");
    if argv.len() < 2 {
        usage(program);
    }

    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            usage(program);
        }
    };

    let dump = args.dump_dir.as_ref().map(DiagnosticsDump::new);

    let mut result = match process_pdf(&args.pdf_path, &args.config, dump.as_ref()) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if args.sort {
        result
            .rows
            .sort_by_key(|row| (row.chapter, row.question_number));
    }

    if let Err(e) = csv::save_rows(&args.output, &result.rows) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    println!("Question/Answer Extraction");
    println!("==========================");
    println!("File: {}", args.pdf_path);
    println!("Pages: {}", result.page_count);
    println!("Rows: {}", result.rows.len());
    println!("Unanswered questions: {}", result.unanswered);
    println!("Orphan answers: {}", result.orphan_answers);
    println!("Processing time: {}ms", result.processing_time_ms);
    println!("CSV written to: {}", args.output);
}
