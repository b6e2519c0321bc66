//! Prompts sent to the text generator

use feastflow_core::generation::GenerationPrompt;

use super::{ContentKind, GenerationContext};

/// System prompt for a kind
#[must_use]
pub const fn system_prompt(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Title => {
            "You are a creative event naming assistant. Generate catchy, engaging event titles \
             that would attract attendees. Keep titles under 50 characters. \
             Reply with the title only."
        },
        ContentKind::Description => {
            "You are an event marketing expert. Create engaging, detailed event descriptions that \
             highlight what attendees can expect. Include activities, atmosphere, and benefits. \
             Keep descriptions between 100-200 words."
        },
        ContentKind::Marketing => {
            "You are a social media marketing expert. Create engaging marketing content for \
             different platforms (Instagram, Facebook, Twitter). Include relevant hashtags and \
             calls-to-action."
        },
    }
}

/// User prompt for a kind, filled from the context
#[must_use]
pub fn user_prompt(kind: ContentKind, context: &GenerationContext) -> String {
    let kind_name = context.event_type();
    let loc = context.location();
    let name = context.event_name();
    match kind {
        ContentKind::Title => format!(
            "Generate a creative title for a {kind_name} event in {loc}. \
             Make it sound exciting and appealing."
        ),
        ContentKind::Description => format!(
            "Create an engaging description for \"{name}\" - a {kind_name} event in {loc}. \
             Focus on the experience, activities, and what makes it special."
        ),
        ContentKind::Marketing => format!(
            "Create marketing content for \"{name}\" - a {kind_name} in {loc}. \
             Include posts for Instagram, Facebook, and Twitter with appropriate hashtags."
        ),
    }
}

/// Default prompt for a kind and context
#[must_use]
pub fn prompt_for(kind: ContentKind, context: &GenerationContext) -> GenerationPrompt {
    GenerationPrompt::new(system_prompt(kind), user_prompt(kind, context))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_carry_context() {
        let context = GenerationContext::new("Wine Tasting", "Whitefield", "Vines & Vibes");
        let prompt = prompt_for(ContentKind::Description, &context);
        assert!(prompt.system.contains("event marketing expert"));
        assert!(prompt.user.contains("\"Vines & Vibes\""));
        assert!(prompt.user.contains("Wine Tasting event in Whitefield"));
    }

    #[test]
    fn test_title_prompt_uses_placeholders() {
        let prompt = prompt_for(ContentKind::Title, &GenerationContext::default());
        assert!(prompt.user.contains("Community Event event in your area"));
    }
}
