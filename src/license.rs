//! Record license ids → Commons license templates.
//!
//! Commons only hosts freely licensed media, so NonCommercial and
//! NoDerivatives variants have no counterpart and map to `None`.

pub fn commons_license(id: &str) -> Option<&'static str> {
    let id = id.trim().to_ascii_lowercase();
    let template = match id.as_str() {
        "cc-by-4.0" => "Cc-by-4.0",
        "cc-by-sa-4.0" => "Cc-by-sa-4.0",
        "cc-by-3.0" => "Cc-by-3.0",
        "cc-by-sa-3.0" => "Cc-by-sa-3.0",
        "cc-by-2.5" => "Cc-by-2.5",
        "cc-by-sa-2.5" => "Cc-by-sa-2.5",
        "cc-by-2.0" => "Cc-by-2.0",
        "cc-by-sa-2.0" => "Cc-by-sa-2.0",
        "cc-by-1.0" => "Cc-by-1.0",
        "cc-by-sa-1.0" => "Cc-by-sa-1.0",
        "cc-zero" | "cc0-1.0" | "cc0" => "Cc-zero",
        "pddl" | "pddl-1.0" | "pdm-1.0" => "PD-author",
        _ => return None,
    };
    Some(template)
}
