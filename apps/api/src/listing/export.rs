pub const EXPORT_FILE_NAME: &str = "listing_variants.txt";

/// Renders all variants as one plain-text document for download.
pub fn to_txt_bundle(variants: &[String]) -> String {
    variants
        .iter()
        .enumerate()
        .map(|(i, text)| format!("=== VARIANT {} ===\n{}\n", i + 1, text))
        .collect::<Vec<_>>()
        .join("\n")
}
