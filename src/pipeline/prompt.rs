use crate::models::ModelTier;

pub const QUALITY_SUFFIX: &str = "professional photography, ultra high resolution, sharp focus";

/// Baseline used when no style is selected, so the request still anchors to realism.
pub const REALISTIC_BASELINE: &str = "realistic environment, natural lighting";

/// Counter-steering for the fast tier's over-smoothed look.
pub const HUMAN_TOUCH: &str = ", masterpiece, best quality, raw photo, shot on 35mm, kodak portra 400, fujifilm, natural skin texture, visible pores, slight film grain, atmospheric lighting, candid, authentic, natural imperfections, anatomical accuracy, physically plausible, depth of field, soft natural shadows, high fidelity, micro details, no cgi, no 3d render, no plastic skin, no artificial smoothing";

pub const VARIATION_ANGLES: [&str; 5] = [
    "cinematic front view",
    "dynamic three-quarter angle",
    "dramatic side profile",
    "low angle perspective",
    "overhead high angle",
];

pub fn tier_modifier(tier: ModelTier) -> &'static str {
    match tier {
        ModelTier::Fast => HUMAN_TOUCH,
        ModelTier::HighQuality => "",
    }
}

/// Trimmed prompt without its trailing run of `.`, `,` and `;`.
pub fn clean_prompt(raw: &str) -> &str {
    raw.trim().trim_end_matches(['.', ',', ';'])
}

pub fn variation_angle(batch_index: usize) -> &'static str {
    VARIATION_ANGLES[batch_index % VARIATION_ANGLES.len()]
}

/// Prompt shared by every member of a batch.
pub fn base_prompt(raw_prompt: &str, style: &str, tier: ModelTier) -> String {
    let prompt = clean_prompt(raw_prompt);
    let style = style.trim();
    let context = if style.is_empty() {
        REALISTIC_BASELINE
    } else {
        style
    };
    format!(
        "{}, {}, {}{}",
        prompt,
        context,
        QUALITY_SUFFIX,
        tier_modifier(tier)
    )
}

pub fn compile(
    raw_prompt: &str,
    style: &str,
    tier: ModelTier,
    batch_index: usize,
    batch_size: usize,
) -> String {
    let base = base_prompt(raw_prompt, style, tier);
    if batch_size > 1 {
        format!("{}, {}", base, variation_angle(batch_index))
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styled_prompt() {
        let compiled = compile("A cat on a roof...;", "film noir", ModelTier::HighQuality, 0, 1);
        assert_eq!(
            compiled,
            format!("A cat on a roof, film noir, {}", QUALITY_SUFFIX)
        );
    }

    #[test]
    fn test_unstyled_prompt_gets_realistic_baseline() {
        let compiled = compile("  portrait of a baker ", "   ", ModelTier::HighQuality, 0, 1);
        assert_eq!(
            compiled,
            "portrait of a baker, realistic environment, natural lighting, professional photography, ultra high resolution, sharp focus"
        );
    }

    #[test]
    fn test_fast_tier_adds_human_touch() {
        let fast = compile("a bridge", "", ModelTier::Fast, 0, 1);
        assert!(fast.ends_with("no artificial smoothing"));
        assert!(fast.contains(&format!("{}{}", QUALITY_SUFFIX, HUMAN_TOUCH)));

        let hq = compile("a bridge", "", ModelTier::HighQuality, 0, 1);
        assert!(!hq.contains("kodak portra"));
    }

    #[test]
    fn test_single_image_has_no_angle() {
        let compiled = compile("a bridge", "", ModelTier::HighQuality, 3, 1);
        assert!(VARIATION_ANGLES.iter().all(|angle| !compiled.contains(angle)));
    }

    #[test]
    fn test_angles_cycle_with_period_five() {
        let base = base_prompt("a bridge", "moody", ModelTier::Fast);
        for index in 0..12 {
            let compiled = compile("a bridge", "moody", ModelTier::Fast, index, 4);
            assert_eq!(
                compiled,
                format!("{}, {}", base, VARIATION_ANGLES[index % 5])
            );
        }
        assert_eq!(
            compile("x", "", ModelTier::Fast, 5, 2),
            compile("x", "", ModelTier::Fast, 0, 2)
        );
    }

    #[test]
    fn test_clean_prompt_keeps_inner_punctuation() {
        assert_eq!(clean_prompt("red, blue; green.,;"), "red, blue; green");
        assert_eq!(clean_prompt("what?"), "what?");
    }
}
