//! Listing prompt template and the substitutions that fill it.

use crate::listing::models::{ListingFormat, ListingRequest, Spelling};

/// Listing prompt template.
/// Replace: {property_type}, {address}, {beds}, {baths}, {features}, {audience},
///          {tone}, {format}, {format_rule}, {title_clause}, {cta_clause},
///          {bullets_clause}, {words_hint}, {spelling_note}, {must_include}, {avoid_text}
pub const LISTING_PROMPT_TEMPLATE: &str = r#"
You are an expert real-estate listing copywriter.

Write a polished listing for a {property_type} at {address}.
It is a {beds}, {baths} property.
Key features: {features}.
Target audience: {audience}.
Desired tone: {tone}.
Formatting style: {format}. {format_rule}
{title_clause}
{cta_clause}
{bullets_clause}
{words_hint}
{spelling_note}
{must_include}
{avoid_text}

Rules:
- Clear, engaging, and sales-focused.
- Avoid repetition and filler.
- No apologies or AI disclaimers.
- Keep it realistic; don't invent features.

Return only the listing text (no extra commentary).
"#;

fn format_rule(format: ListingFormat) -> &'static str {
    match format {
        ListingFormat::Paragraphs => "Produce 1–2 short paragraphs. No bullet lists.",
        ListingFormat::SummaryAndParagraph => {
            "Start with a one-sentence summary, then one paragraph. No bullet lists."
        }
        ListingFormat::HeadlineAndParagraph => {
            "Begin with a short, catchy headline on its own line, then one paragraph."
        }
    }
}

/// Splits a comma-separated field, trimming items and dropping empties.
pub fn split_list(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn bedrooms_label(beds: u32) -> String {
    if beds == 0 {
        "studio".to_string()
    } else {
        format!("{beds}-bedroom")
    }
}

fn bathrooms_label(baths: u32) -> String {
    if baths == 1 {
        "1 bathroom".to_string()
    } else {
        format!("{baths} bathrooms")
    }
}

/// Fills the listing template from the submitted form.
pub fn build_prompt(req: &ListingRequest) -> String {
    let keywords = split_list(&req.include_keywords);
    let avoid = split_list(&req.avoid_phrases);

    let must_include = if keywords.is_empty() {
        String::new()
    } else {
        format!(
            "Ensure you naturally include these keywords: {}.",
            keywords.join(", ")
        )
    };
    let avoid_text = if avoid.is_empty() {
        String::new()
    } else {
        format!("Avoid using these words/phrases: {}.", avoid.join(", "))
    };

    let features = if req.features.trim().is_empty() {
        "N/A"
    } else {
        req.features.as_str()
    };

    let title_clause = if req.add_title {
        "If appropriate, include a property headline/title."
    } else {
        "Do not include a separate headline."
    };
    let cta_clause = if req.add_cta {
        "End with a short one-line call to action."
    } else {
        "Do not include a call to action."
    };
    let bullets_clause = if req.add_bullets {
        "Also include 3 concise selling-point bullets."
    } else {
        "Do not use bullet lists."
    };
    let spelling_note = match req.spelling {
        Spelling::Uk => "Use UK spelling.",
        Spelling::Us => "Use US spelling.",
    };

    let property_type = req.property_type.label().to_lowercase();
    let beds = bedrooms_label(req.bedrooms);
    let baths = bathrooms_label(req.bathrooms);
    let tone = req.tone.label().to_lowercase();
    let words_hint = format!("Aim for ~{} words (±15%).", req.length_words);

    let values = [
        ("property_type", property_type.as_str()),
        ("address", req.address.trim()),
        ("beds", beds.as_str()),
        ("baths", baths.as_str()),
        ("features", features),
        ("audience", req.audience.label()),
        ("tone", tone.as_str()),
        ("format", req.format.label()),
        ("format_rule", format_rule(req.format)),
        ("title_clause", title_clause),
        ("cta_clause", cta_clause),
        ("bullets_clause", bullets_clause),
        ("words_hint", words_hint.as_str()),
        ("spelling_note", spelling_note),
        ("must_include", must_include.as_str()),
        ("avoid_text", avoid_text.as_str()),
    ];

    fill_template(LISTING_PROMPT_TEMPLATE, &values)
        .trim()
        .to_string()
}

/// Substitutes `{name}` placeholders in a single left-to-right pass.
///
/// Inserted values are never rescanned, so user text that happens to contain
/// `{tone}` or similar stays literal. Unknown or unterminated braces are
/// copied through unchanged.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let value = tail.find('}').and_then(|close| {
            let name = &tail[1..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::models::{PropertyType, Tone};

    fn request() -> ListingRequest {
        ListingRequest {
            address: "20 Maunder Close, RM16 6BB".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_prompt_contents() {
        let prompt = build_prompt(&request());
        assert!(prompt.starts_with("You are an expert real-estate listing copywriter."));
        assert!(prompt.ends_with("Return only the listing text (no extra commentary)."));
        assert!(prompt.contains("Write a polished listing for a flat/apartment at 20 Maunder Close, RM16 6BB."));
        assert!(prompt.contains("It is a 2-bedroom, 1 bathroom property."));
        assert!(prompt.contains("Key features: south-facing garden, remodeled kitchen"));
        assert!(prompt.contains("Target audience: General buyers."));
        assert!(prompt.contains("Desired tone: professional."));
        assert!(prompt.contains("Formatting style: Paragraphs. Produce 1–2 short paragraphs."));
        assert!(prompt.contains("If appropriate, include a property headline/title."));
        assert!(prompt.contains("End with a short one-line call to action."));
        assert!(prompt.contains("Do not use bullet lists."));
        assert!(prompt.contains("Aim for ~150 words (±15%)."));
        assert!(prompt.contains("Use UK spelling."));
        assert!(!prompt.contains("Ensure you naturally include"));
        assert!(!prompt.contains("Avoid using these"));
        assert!(!prompt.contains('{'), "all placeholders substituted");
    }

    #[test]
    fn test_studio_and_plural_bathrooms() {
        let prompt = build_prompt(&ListingRequest {
            bedrooms: 0,
            bathrooms: 2,
            ..request()
        });
        assert!(prompt.contains("It is a studio, 2 bathrooms property."));

        let prompt = build_prompt(&ListingRequest {
            bathrooms: 0,
            ..request()
        });
        assert!(prompt.contains("0 bathrooms"));
    }

    #[test]
    fn test_keywords_and_avoid_lists_are_cleaned() {
        let prompt = build_prompt(&ListingRequest {
            include_keywords: " near schools, , chain-free ,".to_string(),
            avoid_phrases: "The property,apologies".to_string(),
            ..request()
        });
        assert!(prompt.contains("Ensure you naturally include these keywords: near schools, chain-free."));
        assert!(prompt.contains("Avoid using these words/phrases: The property, apologies."));
    }

    #[test]
    fn test_flags_flip_clauses() {
        let prompt = build_prompt(&ListingRequest {
            add_title: false,
            add_cta: false,
            add_bullets: true,
            spelling: Spelling::Us,
            ..request()
        });
        assert!(prompt.contains("Do not include a separate headline."));
        assert!(prompt.contains("Do not include a call to action."));
        assert!(prompt.contains("Also include 3 concise selling-point bullets."));
        assert!(prompt.contains("Use US spelling."));
    }

    #[test]
    fn test_labels_are_lowercased_and_empty_features() {
        let prompt = build_prompt(&ListingRequest {
            property_type: PropertyType::NewBuild,
            tone: Tone::FamilyFriendly,
            format: ListingFormat::HeadlineAndParagraph,
            features: "  ".to_string(),
            ..request()
        });
        assert!(prompt.contains("for a new build at"));
        assert!(prompt.contains("Desired tone: family-friendly."));
        assert!(prompt.contains("Key features: N/A."));
        assert!(prompt.contains("Begin with a short, catchy headline on its own line"));
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a, b ,,c"), vec!["a", "b", "c"]);
        assert!(split_list(" , ").is_empty());
    }

    #[test]
    fn test_user_text_with_placeholders_stays_literal() {
        let prompt = build_prompt(&ListingRequest {
            address: "Unit {tone} Court".to_string(),
            features: "garden, {spelling_note}".to_string(),
            include_keywords: "{avoid_text}".to_string(),
            ..request()
        });
        assert!(prompt.contains("for a flat/apartment at Unit {tone} Court."));
        assert!(prompt.contains("Key features: garden, {spelling_note}."));
        assert!(prompt.contains("Ensure you naturally include these keywords: {avoid_text}."));
        assert!(prompt.contains("Desired tone: professional."));
        assert_eq!(prompt.matches("Use UK spelling.").count(), 1);
    }

    #[test]
    fn test_fill_template_keeps_unknown_braces() {
        let values = [("a", "{b}"), ("b", "x")];
        assert_eq!(fill_template("{a} {b} {c} {", &values), "{b} x {c} {");
        assert_eq!(fill_template("{{a}}", &values), "{{b}}");
    }
}
