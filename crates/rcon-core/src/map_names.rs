//! Display names for map identifiers.
//!
//! The wire uses identifiers like `foy_warfare` or
//! `kursk_offensive_ger`; the web layer wants "Foy Warfare" and
//! "Kursk Off. GER".

/// Long display name for a bare map id (without gamemode suffix).
fn base_name(id: &str) -> Option<&'static str> {
    Some(match id {
        "stmereeglise" => "Sainte-Mère-Église",
        "stmariedumont" => "St. Marie Du Mont",
        "utahbeach" => "Utah Beach",
        "omahabeach" => "Omaha Beach",
        "purpleheartlane" => "Purple Heart Lane",
        "carentan" => "Carentan",
        "hurtgenforest" => "Hürtgen Forest",
        "hill400" => "Hill 400",
        "foy" => "Foy",
        "kursk" => "Kursk",
        "stalingrad" => "Stalingrad",
        "remagen" => "Remagen",
        "kharkov" => "Kharkov",
        "driel" => "Driel",
        "elalamein" => "El Alamein",
        _ => return None,
    })
}

/// Turn a wire map identifier into a human-readable name.
///
/// Unknown identifiers fall back to a capitalized form of the id so
/// new maps never break display.
pub fn pretty(map_id: &str) -> String {
    let (id, suffix) = if let Some((id, rest)) = map_id.split_once("_warfare") {
        let night = rest.contains("night");
        (id, if night { " Warfare (Night)" } else { " Warfare" }.to_string())
    } else if let Some((id, attackers)) = map_id
        .split_once("_offensive_")
        .or_else(|| map_id.split_once("_off_"))
    {
        (id, format!(" Off. {}", attackers.to_uppercase()))
    } else {
        (map_id, String::new())
    };

    let base = match base_name(id) {
        Some(name) => name.to_string(),
        None => {
            let mut chars = id.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    };

    format!("{}{}", base, suffix)
}
