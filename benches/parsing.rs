//! Benchmark suite for the statement pipeline
//!
//! Measures parsing, validation and the full pipeline on generated
//! statements of increasing length, using the divan benchmarking framework.
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench
//! ```

use secrecy::SecretString;
use statement_import::core::{parse, BalanceValidator, ImportPipeline, PipelineConfig, RawArchive};
use statement_import::io::PlainTextExtractor;
use statement_import::types::IdentityKey;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{AesMode, CompressionMethod, ZipWriter};

const PASSWORD: &str = "s3cret";

fn main() {
    divan::main();
}

/// A balanced statement with `count` card payments of 1.00 EUR
fn statement(count: usize) -> String {
    let mut text = String::from(
        "Титуляр на сметката 1234567 ИВАН ПЕТРОВ ИВАНОВ\n\
         IBAN: BG00UBBS00001234567890\n\
         Период на извлечението: ОТ 01 ЯНУ 2024 ДО 31 ЯНУ 2024\n\
         Пореден номер / Дата: 1 / 31 ЯНУ 2024\n\
         Начално салдо: 100,000.00 EUR / 195,583.00 BGN\n",
    );
    for n in 0..count {
        let day = n % 28 + 1;
        text.push_str(&format!(
            "{:02}/01/24 {:02}/01 PO{:06} КАРТОВА ТРАНЗАКЦИЯ -1.00 EUR / -1.96 BGN\n\
             SHOP {}-SOFIA-BG\n",
            day, day, n, n
        ));
    }
    let closing_eur = 100_000 - count as i64;
    let closing_bgn = 19_558_300 - 196 * count as i64;
    text.push_str(&format!(
        "Крайно салдо: {}.00 EUR / {}.{:02} BGN\n",
        closing_eur,
        closing_bgn / 100,
        closing_bgn % 100
    ));
    text
}

fn archive(content: &str) -> RawArchive {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .with_aes_encryption(AesMode::Aes256, PASSWORD);
    writer
        .start_file("statement.pdf", options)
        .expect("Failed to start entry");
    writer
        .write_all(content.as_bytes())
        .expect("Failed to write entry");
    RawArchive::new(
        "bench.zip",
        writer.finish().expect("Failed to finish zip").into_inner(),
    )
}

#[divan::bench(args = [10, 100, 1000])]
fn parse_statement(bencher: divan::Bencher, count: usize) {
    let text = statement(count);
    bencher.bench(|| parse(divan::black_box(&text)).expect("Parsing failed"));
}

#[divan::bench(args = [10, 100, 1000])]
fn parse_and_validate(bencher: divan::Bencher, count: usize) {
    let text = statement(count);
    let validator = BalanceValidator::default();
    bencher.bench(|| {
        let statement = parse(divan::black_box(&text)).expect("Parsing failed");
        validator.validate(&statement)
    });
}

#[divan::bench(args = [10, 1000])]
fn full_pipeline(bencher: divan::Bencher, count: usize) {
    let archive = archive(&statement(count));
    let pipeline = ImportPipeline::new(PipelineConfig::default(), Box::new(PlainTextExtractor));
    let password = SecretString::new(PASSWORD.to_string());
    let known = HashSet::<IdentityKey>::new();
    bencher.bench(|| pipeline.run(divan::black_box(&archive), &password, &known));
}
