use std::time::{Duration, Instant};

use qrmatrix::{ECLevel, QRBuilder, Version};

const ITERATIONS: u32 = 50;

fn benchmark_case(name: &str, data: &str, ecl: ECLevel) -> Duration {
    let start = Instant::now();
    let mut version = Version::MIN;
    for _ in 0..ITERATIONS {
        let qr = QRBuilder::text(data).ec_level(ecl).build().expect("Failed to build QR");
        version = qr.version();
    }
    let elapsed = start.elapsed();
    println!(
        "{name:<24} version {:>2}, level {ecl:?}: {:?} per symbol",
        *version,
        elapsed / ITERATIONS
    );
    elapsed
}

fn main() {
    println!("Running QR Encoding Benchmarks");
    println!("==============================\n");

    let total_start = Instant::now();

    let cases = [
        ("Short alphanumeric", "HELLO WORLD".to_string(), ECLevel::M),
        ("URL", "https://example.com/path?query=1234567890".to_string(), ECLevel::Q),
        ("Mixed", "aAAAAAAAAA111111111111111111AAAAAAAAAAa".repeat(20), ECLevel::Q),
        ("Long numeric", "1234567890".repeat(305), ECLevel::H),
        ("Long bytes", "B3@j#Z%8vK!3zC^8&rF9*b6".repeat(120), ECLevel::L),
    ];

    for (name, data, ecl) in cases.iter() {
        benchmark_case(name, data, *ecl);
    }

    println!("\nAll benchmarks completed!");
    println!("Total time elapsed: {:?}", total_start.elapsed());
}
