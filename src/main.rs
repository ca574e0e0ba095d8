// Command line front end for the extraction pipeline: point it at a scanned
// visa or passport and get the client record back.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use tasheera::models::ExtractedRecord;
use tasheera::processing::ocr::DEFAULT_OCR_LANGUAGES;
use tasheera::processing::{PdfiumRasterizer, SkinRegionDetector, TesseractRecognizer};
use tasheera::ExtractionPipeline;

#[derive(Parser)]
#[command(name = "tasheera", version, about = "Extract client fields from a scanned visa or passport")]
struct Args {
    /// Scanned document to process (image or PDF)
    document: PathBuf,

    /// Print the record as JSON instead of a readable report
    #[arg(long)]
    json: bool,

    /// Tesseract language hint
    #[arg(long, default_value = DEFAULT_OCR_LANGUAGES)]
    lang: String,
}

fn print_report(record: &ExtractedRecord) {
    println!("\n===============================================");
    println!("           EXTRACTED CLIENT RECORD");
    println!("===============================================\n");

    println!("  Full Name:       {}", display_or_dash(&record.full_name));
    println!("  Email:           {}", display_or_dash(&record.email));
    println!("  Passport Number: {}", display_or_dash(&record.passport_number));
    println!("  Visa Number:     {}", display_or_dash(&record.visa_number));
    println!("  Birth Date:      {}", display_or_dash(&record.birth_date));
    println!(
        "  Client Photo:    {}",
        if record.client_photo.is_empty() {
            "(none)".to_string()
        } else {
            format!("JPEG data URI, {} bytes", record.client_photo.len())
        }
    );
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let file_bytes = match std::fs::read(&args.document) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Cannot read {}: {}", args.document.display(), e);
            process::exit(1);
        }
    };

    let pipeline = ExtractionPipeline::with_collaborators(
        Box::new(PdfiumRasterizer::new()),
        Box::new(TesseractRecognizer::with_languages(&args.lang)),
        Box::new(SkinRegionDetector::new()),
    );

    match pipeline.extract(&file_bytes) {
        Ok(record) => {
            if args.json {
                match serde_json::to_string_pretty(&record) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Failed to serialize record: {}", e);
                        process::exit(1);
                    }
                }
            } else {
                print_report(&record);
            }
        }
        Err(e) => {
            eprintln!("Failed to extract data from the document: {}", e);
            process::exit(1);
        }
    }
}
