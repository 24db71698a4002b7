//! Fixed few-shot transcript for entity/aspect extraction.

use crate::llm::ChatMessage;

const SYSTEM_PROMPT: &str = "You are an NLP customer review analyzer who knows how to find \
which named entity a review is addressing and the aspect/opinion about this named entity.";

const EXTRACTION_RULES: &str = r#"Your task is to extract both the entity and the aspect/opinion that are literally mentioned in the review.

Pay attention to the following (important):
- The entity and aspect/opinion MUST be explicitly mentioned in the review. Do NOT infer by yourself.
- The entity can be more than one word long (e.g., "Chinese restaurant").
- The aspect/opinion can be more than one word long (e.g., "delicious and fantastic", "amazingly good").
- There could be more than one entity-aspect pair in the same review (e.g., "The pizza was terrific but the music was bad" -> {pizza: terrific, music: bad}).
- If you can't find the entity or aspect/opinion, return "None".
- The review can be a full sentence but could also simply be a phrase or utterance.
- Return the response in the following JSON format: {incremental number: {"named_entity": str, "aspect": List[str]}}

Entity - what it is that the customer is referring to in the review (e.g., "Chinese restaurant", "service", "meal", "waitress", "food").
Aspect (opinion) - how the entity is described by the customer (e.g., "great", "amazing", "took too much time to prepare", "patient", "superb")."#;

const RULES_ACKNOWLEDGEMENT: &str = "I acknowledge that I am a customer review analyzer who \
finds both the named entity mentioned in a review and the aspect/opinion addressed to that \
named entity. I understand your request and will look for and find both the named entity and \
the aspect/opinion.";

/// Worked examples as `(review, pairs)`; rendered into the few-shot message.
pub const FEW_SHOT_EXAMPLES: [(&str, &[(&str, &str)]); 12] = [
    ("The food is decent", &[("food", "decent")]),
    ("The Steak Tartare was splendid", &[("Steak Tartare", "splendid")]),
    ("The service is top-notch", &[("service", "top-notch")]),
    (
        "I had the duck breast special on my last visit and it was incredible.",
        &[("duck breast special", "incredible")],
    ),
    (
        "The hostess was extremely rude and offensive",
        &[("hostess", "extremely rude and offensive")],
    ),
    (
        "Chow fun was dry ; pork shu mai was more than usually greasy and had to share a table with loud and rude family.",
        &[
            ("Chow fun", "dry"),
            ("pork shu mai", "more than usually greasy"),
            ("table", "had to share with loud and rude family"),
        ],
    ),
    (
        "The waiter took his time with the food",
        &[("waiter", "took his time with the food")],
    ),
    (
        "Ambience is delightful, service impeccable.",
        &[("ambience", "delightful"), ("service", "impeccable")],
    ),
    ("I won't come back again", &[("None", "None")]),
    (
        "We, there were four of us, arrived at noon - the place was empty - and the staff acted like we were imposing on them and they were very rude.",
        &[
            ("place", "empty"),
            ("staff", "acted like we were imposing on them"),
            ("staff", "very rude"),
        ],
    ),
    (
        "The food is very average . . .the Thai fusion stuff is a bit too sweet , every thing they serve is too sweet here.",
        &[
            ("food", "very average"),
            ("Thai fusion stuff", "a bit too sweet"),
            ("everything they serve", "too sweet"),
        ],
    ),
    (
        "The only thing I moderately enjoyed was their Grilled Chicken special with Edamame Puree.",
        &[("Grilled Chicken special with Edamame Puree", "moderately enjoyed")],
    ),
];

const REVIEW_REQUEST: &str = "Please provide the review you want me to analyze.";

/// Build the six-message extraction transcript for one review.
///
/// Order: system persona, rules, acknowledgement, few-shot examples, review
/// request, review text. Only the last message depends on the input.
pub fn build_transcript(review: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(EXTRACTION_RULES),
        ChatMessage::assistant(RULES_ACKNOWLEDGEMENT),
        ChatMessage::user(render_few_shot()),
        ChatMessage::assistant(REVIEW_REQUEST),
        ChatMessage::user(review.trim()),
    ]
}

fn render_few_shot() -> String {
    let mut out = String::from(
        "Below are a few examples for you to learn from (few-shot learning):\n",
    );
    for (review, pairs) in FEW_SHOT_EXAMPLES {
        let rendered = pairs
            .iter()
            .map(|(entity, aspect)| format!("{entity} (entity), {aspect} (aspect)"))
            .collect::<Vec<_>>()
            .join("; ");
        out.push_str(&format!("\"{review}\" --> {rendered}\n"));
    }
    out
}
