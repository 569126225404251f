use pdf_qa_extract::extractor::{extract_columns, ExtractConfig};
use std::env;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: debug_columns <pdf_path> [max_page | min-max]");
        std::process::exit(1);
    }

    let range = args.get(2).map(|s| s.as_str()).unwrap_or("14-16");
    let (min_page, max_page): (u32, u32) = if let Some((a, b)) = range.split_once('-') {
        (a.parse().unwrap_or(14), b.parse().unwrap_or(16))
    } else {
        (0, range.parse().unwrap_or(16))
    };

    let config = ExtractConfig {
        start_page: min_page,
        end_page: Some(max_page.saturating_add(1)),
        workers: 1,
        ..Default::default()
    };
    let pages = extract_columns(&args[1], &config).expect("Failed to extract");

    for page in &pages {
        println!("=== PAGE {} ===", page.page_number);
        println!("--- left ---");
        println!("{}", page.left_text.as_deref().unwrap_or("<no text>"));
        println!("--- right ---");
        println!("{}", page.right_text.as_deref().unwrap_or("<no text>"));
        println!();
    }
}
