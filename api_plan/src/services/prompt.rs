use catalog::{SpotCatalog, model::Spot};
use serde::Serialize;

use crate::dtos::plan::{ItineraryRequest, PrefectureFilter};

/// Reduced spot projection sent to the provider. Keeps the prompt small
/// enough to stay well inside the request deadline.
#[derive(Serialize)]
struct SpotContext<'a> {
    name: &'a str,
    prefecture: &'a str,
    categories: String,
    desc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<&'a str>,
}

const DESC_PREFIX_CHARS: usize = 80;

fn project(spot: &Spot) -> SpotContext<'_> {
    SpotContext {
        name: &spot.name,
        prefecture: spot.prefecture.as_str(),
        categories: spot
            .categories
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join("/"),
        desc: spot.description.chars().take(DESC_PREFIX_CHARS).collect(),
        duration: spot.duration.as_deref(),
    }
}

/// Builds the deterministic generation prompt for one request.
///
/// When the request anchors on a catalog spot, a forced-inclusion
/// instruction naming that spot leads the prompt; the model has to plan the
/// trip around it rather than having it filtered in afterwards.
pub fn build_prompt(catalog: &SpotCatalog, request: &ItineraryRequest) -> String {
    let relevant_spots: Vec<SpotContext> = catalog
        .filter(request.prefecture.as_option(), None)
        .into_iter()
        .map(project)
        .collect();
    let spots_json =
        serde_json::to_string_pretty(&relevant_spots).unwrap_or_else(|_| "[]".to_string());

    let focus_area = match request.prefecture {
        PrefectureFilter::All => "All of Kyushu (Kumamoto, Oita, Miyazaki)".to_string(),
        PrefectureFilter::One(p) => p.to_string(),
    };

    let mut prompt = String::new();

    if let Some(anchor) = request.spot_id.as_deref().and_then(|id| catalog.get(id)) {
        prompt.push_str(&format!(
            "IMPORTANT: The traveler is planning this trip around {name}. \
The itinerary MUST include {name} as one of its stops.\n\n",
            name = anchor.name
        ));
    }

    prompt.push_str(&format!(
        r#"You are a local Kyushu travel expert helping a foreign tourist plan an authentic trip.

Available spots in our curated database:
{spots_json}

Create a {days}-day itinerary for a traveler with these preferences:
- Interests: {interests}
- Travel pace: {pace}
- Focus area: {focus_area}

Return ONLY valid JSON matching this exact structure (no markdown, no explanation):
{{
  "title": "Creative trip title",
  "overview": "2-3 sentence overview of this trip",
  "days": [
    {{
      "day": 1,
      "title": "Day theme title",
      "spots": [
        {{
          "name": "Spot name",
          "description": "Why visit and what to do (2 sentences)",
          "time": "Suggested time (e.g. '9:00 AM - 12:00 PM')",
          "tip": "Insider tip locals know but tourists miss"
        }}
      ]
    }}
  ]
}}

Rules:
- Use spots from the database when possible, but you may add real Kyushu spots not in the list
- Match the pace: relaxed=1-2 spots/day, moderate=3-4, packed=5+
- Start with the most iconic spot of the trip on day 1
- Include at least one meal recommendation per day
- Tips should be genuinely useful and specific (best time to arrive, what to order, hidden details)"#,
        days = request.days,
        interests = request.interests.join(", "),
        pace = request.pace,
    ));

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::plan::Pace;
    use catalog::model::Prefecture;

    fn request(prefecture: PrefectureFilter, spot_id: Option<&str>) -> ItineraryRequest {
        ItineraryRequest {
            days: 3,
            interests: vec!["Nature & Hiking".to_string(), "Onsen & Wellness".to_string()],
            pace: Pace::Moderate,
            prefecture,
            spot_id: spot_id.map(str::to_string),
        }
    }

    #[test]
    fn anchor_spot_forces_inclusion_instruction() {
        let catalog = SpotCatalog::load();
        let prompt = build_prompt(
            &catalog,
            &request(PrefectureFilter::One(Prefecture::Kumamoto), Some("aso-caldera")),
        );

        assert!(prompt.contains("MUST include Mount Aso Caldera"));
        assert!(prompt.starts_with("IMPORTANT:"));
    }

    #[test]
    fn unknown_anchor_is_ignored() {
        let catalog = SpotCatalog::load();
        let prompt = build_prompt(
            &catalog,
            &request(PrefectureFilter::All, Some("spot-that-does-not-exist")),
        );
        assert!(!prompt.contains("IMPORTANT:"));
        assert!(prompt.starts_with("You are a local Kyushu travel expert"));
    }

    #[test]
    fn spot_list_respects_prefecture_filter() {
        let catalog = SpotCatalog::load();
        let prompt = build_prompt(
            &catalog,
            &request(PrefectureFilter::One(Prefecture::Miyazaki), None),
        );

        assert!(prompt.contains("Takachiho Gorge"));
        assert!(!prompt.contains("Kumamoto Castle"));
        assert!(prompt.contains("- Focus area: Miyazaki"));
    }

    #[test]
    fn all_prefectures_widen_the_focus_area() {
        let catalog = SpotCatalog::load();
        let prompt = build_prompt(&catalog, &request(PrefectureFilter::All, None));
        assert!(prompt.contains("Focus area: All of Kyushu (Kumamoto, Oita, Miyazaki)"));
        assert!(prompt.contains("- Interests: Nature & Hiking, Onsen & Wellness"));
        assert!(prompt.contains("Create a 3-day itinerary"));
    }

    #[test]
    fn descriptions_are_truncated_in_the_projection() {
        let catalog = SpotCatalog::load();
        let long_description = &catalog.get("aso-caldera").unwrap().description;
        assert!(long_description.chars().count() > DESC_PREFIX_CHARS);

        let prompt = build_prompt(
            &catalog,
            &request(PrefectureFilter::One(Prefecture::Kumamoto), None),
        );
        let prefix: String = long_description.chars().take(DESC_PREFIX_CHARS).collect();
        assert!(prompt.contains(&prefix));
        assert!(!prompt.contains(long_description.as_str()));
    }

    #[test]
    fn pacing_rules_are_always_present() {
        let catalog = SpotCatalog::load();
        let prompt = build_prompt(&catalog, &request(PrefectureFilter::All, None));
        assert!(prompt.contains("relaxed=1-2 spots/day, moderate=3-4, packed=5+"));
        assert!(prompt.contains("Return ONLY valid JSON"));
    }
}
