/// Keyword-based topic tagging, used whenever the LLM gateway is disabled
/// or a call fails. Fixed civic vocabulary, first match per tag wins.
const VOCAB: &[(&str, &str)] = &[
    ("zoning", "zoning"),
    ("rezoning", "zoning"),
    ("land development", "land-use"),
    ("land use", "land-use"),
    ("permit", "land-use"),
    ("housing", "housing"),
    ("homestead", "housing"),
    ("affordable", "housing"),
    ("budget", "budget"),
    ("appropriation", "budget"),
    ("tax", "taxes"),
    ("ad valorem", "taxes"),
    ("bond", "bonds"),
    ("transportation", "transportation"),
    ("transit", "transportation"),
    ("sidewalk", "transportation"),
    ("police", "public-safety"),
    ("fire department", "public-safety"),
    ("emergency", "public-safety"),
    ("park", "parks"),
    ("recreation", "parks"),
    ("water", "utilities"),
    ("wastewater", "utilities"),
    ("utility", "utilities"),
    ("electric", "utilities"),
    ("election", "elections"),
    ("contract", "contracts"),
    ("procurement", "contracts"),
];

const MAX_TAGS: usize = 5;

pub fn extract_tags(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut tags: Vec<String> = Vec::new();
    for (needle, tag) in VOCAB {
        if tags.len() >= MAX_TAGS {
            break;
        }
        if lower.contains(needle) && !tags.iter().any(|t| t == tag) {
            tags.push((*tag).to_string());
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_match_vocabulary() {
        let tags = extract_tags(
            "An ordinance amending the zoning map and authorizing a contract for park maintenance.",
        );
        assert_eq!(tags, vec!["zoning", "parks", "contracts"]);
    }

    #[test]
    fn duplicate_topics_collapse() {
        let tags = extract_tags("Rezoning request; zoning change for the same parcel.");
        assert_eq!(tags, vec!["zoning"]);
    }

    #[test]
    fn cap_at_five_tags() {
        let text = "zoning housing budget tax bond transportation police park water election";
        assert_eq!(extract_tags(text).len(), 5);
    }

    #[test]
    fn no_match_no_tags() {
        assert!(extract_tags("Proclamation honoring a retiring employee.").is_empty());
    }
}
