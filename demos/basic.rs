//! Basic example of using diag-xml as a library
//!
//! Converts a code list and prints the records read back from the result.

use diag_xml::{Config, Converter, XmlLayout, read_records};

fn main() -> anyhow::Result<()> {
    let config = Config::builder()
        .input_path("./convert_to_xml/imrt_codes.txt")
        .output_path("./output/imrt_codes.xml")
        .layout(XmlLayout::Indented(2))
        .verify(true)
        .build()?;

    let stats = Converter::new(config)?.run()?;
    stats.print_summary();

    let xml = std::fs::read_to_string(&stats.output_path)?;
    for record in read_records(&xml)?.iter().take(5) {
        println!("{:<10} {}", record.code, record.description);
    }

    println!("\n✓ Converted {} records into {}", stats.records, stats.output_path);

    Ok(())
}
