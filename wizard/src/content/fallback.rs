//! Template-based content
//!
//! Total and pure: every `(kind, context)` maps to a fixed set of candidate
//! strings, and the same context always picks the same candidate.

use super::{ContentKind, GenerationContext};

/// Event types with dedicated templates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Theme {
    FoodFestival,
    MusicAndDining,
    Workshop,
    CommunityGathering,
    PopUpMarket,
    CulturalEvent,
}

impl Theme {
    fn from_event_type(event_type: &str) -> Option<Self> {
        match event_type.trim().to_lowercase().as_str() {
            "food festival" => Some(Self::FoodFestival),
            "music & dining" | "live music & dining" => Some(Self::MusicAndDining),
            "workshop" | "cooking workshop" => Some(Self::Workshop),
            "community gathering" => Some(Self::CommunityGathering),
            "pop-up market" => Some(Self::PopUpMarket),
            "cultural event" | "cultural night" => Some(Self::CulturalEvent),
            _ => None,
        }
    }
}

/// Every string `generate` may return for this kind and context
#[must_use]
pub fn candidates(kind: ContentKind, context: &GenerationContext) -> Vec<String> {
    match kind {
        ContentKind::Title => titles(context),
        ContentKind::Description => vec![description(context)],
        ContentKind::Marketing => vec![marketing(context)],
    }
}

/// Deterministic template content
#[must_use]
pub fn generate(kind: ContentKind, context: &GenerationContext) -> String {
    let options = candidates(kind, context);
    let count = u64::try_from(options.len()).unwrap_or(1).max(1);
    let index = usize::try_from(stable_hash(kind, context) % count).unwrap_or(0);
    options.into_iter().nth(index).unwrap_or_default()
}

/// FNV-1a over the kind and the resolved context
fn stable_hash(kind: ContentKind, context: &GenerationContext) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;

    [
        kind.as_str(),
        context.event_type(),
        context.location(),
        context.event_name(),
    ]
    .iter()
    .flat_map(|part| part.bytes().chain(std::iter::once(0)))
    .fold(OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}

fn titles(context: &GenerationContext) -> Vec<String> {
    let loc = context.location();
    match Theme::from_event_type(context.event_type()) {
        Some(Theme::FoodFestival) => vec![
            format!("Flavors of {loc} Festival"),
            format!("{loc} Food Extravaganza"),
            format!("Taste of {loc}"),
            format!("Culinary Delights in {loc}"),
        ],
        Some(Theme::MusicAndDining) => vec![
            format!("{loc} Music & Bites"),
            format!("Harmony & Flavors in {loc}"),
            format!("Dine & Groove {loc}"),
            format!("Musical Feast at {loc}"),
        ],
        Some(Theme::Workshop) => vec![
            format!("{loc} Learning Hub"),
            format!("Skill Building in {loc}"),
            format!("Creative Workshop {loc}"),
            format!("Hands-on {loc} Experience"),
        ],
        Some(Theme::CommunityGathering) => vec![
            format!("{loc} Community Connect"),
            format!("Neighbors Unite in {loc}"),
            format!("{loc} Social Circle"),
            format!("Community Spirit {loc}"),
        ],
        Some(Theme::PopUpMarket) => vec![
            format!("{loc} Pop-up Bazaar"),
            format!("Weekend Market {loc}"),
            format!("Local Finds in {loc}"),
            format!("Artisan Market {loc}"),
        ],
        Some(Theme::CulturalEvent) => vec![
            format!("Cultural Celebration {loc}"),
            format!("Heritage Festival {loc}"),
            format!("{loc} Cultural Showcase"),
            format!("Traditional Arts in {loc}"),
        ],
        None => {
            let kind = context.event_type();
            vec![
                format!("Amazing {kind} in {loc}"),
                format!("{loc} {kind} Experience"),
                format!("Unforgettable {kind} at {loc}"),
            ]
        },
    }
}

fn description(context: &GenerationContext) -> String {
    let loc = context.location();
    let title = context.event_name();
    match Theme::from_event_type(context.event_type()) {
        Some(Theme::FoodFestival) => format!(
            "Join us for {title}, where culinary excellence meets community spirit! \
             Experience a diverse array of flavors from local restaurants and food vendors \
             in {loc}. From street food favorites to gourmet delicacies, there's something \
             to satisfy every palate. Enjoy live cooking demonstrations, taste testing \
             sessions, and the chance to meet the talented chefs behind your favorite \
             dishes. This family-friendly event promises delicious memories and new food \
             discoveries. Don't miss this celebration of {loc}'s vibrant food scene!"
        ),
        Some(Theme::MusicAndDining) => format!(
            "Get ready for {title}, an unforgettable evening combining great music with \
             exceptional dining in {loc}! Experience live performances by talented local \
             artists while enjoying carefully curated food from our partner restaurants. \
             The perfect blend of acoustic ambiance and culinary artistry awaits you. \
             Whether you're a music lover, foodie, or both, this event offers a unique \
             atmosphere where melodies and flavors come together to create magical moments."
        ),
        Some(Theme::Workshop) => format!(
            "Discover new skills and connect with like-minded individuals at {title} in \
             {loc}! This hands-on workshop offers practical learning experiences led by \
             industry experts. Whether you're a beginner or looking to advance your \
             knowledge, our interactive sessions provide valuable insights and techniques. \
             Enjoy networking opportunities, take-home materials, and the satisfaction of \
             learning something new. Join our community of learners and makers in this \
             enriching educational experience."
        ),
        Some(Theme::CommunityGathering) => format!(
            "Come together for {title}, a heartwarming community event in {loc}! This \
             gathering celebrates the spirit of neighborhood connection and local pride. \
             Enjoy activities for all ages, meet your neighbors, and participate in fun \
             community initiatives. From games and entertainment to local showcases, this \
             event strengthens the bonds that make our community special. Bring your family \
             and friends for an afternoon of joy, connection, and community spirit."
        ),
        Some(Theme::PopUpMarket) => format!(
            "Explore unique finds and support local businesses at {title} in {loc}! This \
             curated pop-up market features handcrafted goods, artisanal products, and \
             one-of-a-kind treasures from talented local vendors. Discover everything from \
             handmade jewelry and artwork to specialty foods and vintage finds. It's the \
             perfect opportunity to shop local, meet the makers, and find that special \
             something you won't find anywhere else."
        ),
        Some(Theme::CulturalEvent) => format!(
            "Immerse yourself in the rich cultural heritage at {title} in {loc}! This \
             vibrant celebration showcases traditional arts, performances, and customs that \
             define our community's identity. Experience authentic music, dance, art \
             exhibitions, and cultural demonstrations. Learn about diverse traditions, enjoy \
             traditional cuisine, and participate in cultural activities that bring our \
             community's heritage to life."
        ),
        None => {
            let kind = context.event_type();
            format!(
                "Join us for {title}, an exciting {kind} in {loc}! This carefully planned event \
                 brings together community members for an unforgettable experience. Enjoy \
                 engaging activities, connect with fellow attendees, and create lasting \
                 memories. Whether you're looking to learn, socialize, or simply have fun, \
                 this event offers something special for everyone. Don't miss this \
                 opportunity to be part of our vibrant {loc} community!"
            )
        },
    }
}

fn hashtag(text: &str) -> String {
    text.chars().filter(|c| c.is_alphanumeric()).collect()
}

fn marketing(context: &GenerationContext) -> String {
    let name = context.event_name();
    let kind = context.event_type();
    let loc = context.location();
    let name_tag = hashtag(name);
    let loc_tag = hashtag(loc);
    let kind_tag = hashtag(kind);

    format!(
        "🎉 **Instagram Post:**\n\
         Don't miss {name} in {loc}! ✨ An amazing {kind} experience awaits you. \
         Join us for unforgettable moments and community connection!\n\
         #{name_tag} #{loc_tag}Events #Community #{kind_tag} #LocalEvents\n\
         \n\
         📘 **Facebook Post:**\n\
         We're excited to invite you to {name}! This {kind} in {loc} promises to be an incredible \
         experience for the whole community. Mark your calendars and bring your friends!\n\
         \n\
         🐦 **Twitter Post:**\n\
         🎊 {name} is coming to {loc}! Join us for this amazing {kind} and be part of something \
         special. See you there! #LocalEvents #Community #{kind_tag}\n\
         \n\
         📱 **Story Caption:**\n\
         Get ready for {name}! Swipe up to learn more about this exciting {kind} in {loc}. \
         Can't wait to see you there! 🙌"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn koramangala() -> GenerationContext {
        GenerationContext::new("Food Festival", "Koramangala", "")
    }

    #[test]
    fn test_title_draws_from_food_festival_set() {
        let context = koramangala();
        let title = generate(ContentKind::Title, &context);
        assert!(candidates(ContentKind::Title, &context).contains(&title));
        assert!(title.contains("Koramangala"));
        assert_eq!(generate(ContentKind::Title, &context), title);
    }

    #[test]
    fn test_unknown_type_uses_generic_templates() {
        let context = GenerationContext::new("Silent Disco", "Indiranagar", "");
        let options = candidates(ContentKind::Title, &context);
        assert_eq!(options.len(), 3);
        assert!(options.iter().all(|t| t.contains("Silent Disco") && t.contains("Indiranagar")));
    }

    #[test]
    fn test_aliases_share_templates() {
        let live = GenerationContext::new("Live Music & Dining", "HSR Layout", "");
        let plain = GenerationContext::new("Music & Dining", "HSR Layout", "");
        assert_eq!(
            candidates(ContentKind::Title, &live),
            candidates(ContentKind::Title, &plain)
        );
    }

    #[test]
    fn test_empty_context_uses_placeholders() {
        let text = generate(ContentKind::Description, &GenerationContext::default());
        assert!(text.contains("Your Event"));
        assert!(text.contains("your area"));
        assert!(text.contains("Community Event"));
    }

    #[test]
    fn test_descriptions_keep_every_sentence() {
        let cases = [
            ("Workshop", "Join our community of learners and makers"),
            ("Community Gathering", "From games and entertainment to local showcases"),
            ("Pop-up Market", "handmade jewelry and artwork to specialty foods and vintage finds"),
            ("Cultural Event", "Learn about diverse traditions, enjoy traditional cuisine"),
            ("Silent Disco", "Whether you're looking to learn, socialize, or simply have fun"),
        ];
        for (event_type, sentence) in cases {
            let context = GenerationContext::new(event_type, "Jayanagar", "Open Day");
            let text = generate(ContentKind::Description, &context);
            assert!(text.contains(sentence), "{event_type}: {text}");
            assert!(!text.contains("  "));
        }
    }

    #[test]
    fn test_marketing_hashtags_strip_spaces_and_symbols() {
        let context = GenerationContext::new("Music & Dining", "HSR Layout", "Jazz Night");
        let text = generate(ContentKind::Marketing, &context);
        assert!(text.contains("#JazzNight"));
        assert!(text.contains("#HSRLayoutEvents"));
        assert!(text.contains("#MusicDining"));
        assert!(text.contains("**Story Caption:**"));
    }
}
