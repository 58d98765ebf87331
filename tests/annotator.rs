use spoiler_scope::nlp::{
    annotate::{Annotator, EntityLabel, Pos, MAX_TEXT_CHARS},
    features::TextFeatures,
    lexicon::{lemmatize, LexiconAnnotator},
};

#[test]
fn counts_use_full_stream_and_tokens_are_filtered() {
    let doc = LexiconAnnotator
        .annotate("She killed the villain in London.")
        .unwrap();
    let features = TextFeatures::from_doc(&doc);

    assert_eq!(features.noun_count, 1);
    assert_eq!(features.verb_count, 1);
    assert_eq!(features.gpe_count, 1);
    assert_eq!(features.person_count, 0);
    assert_eq!(features.token_string, "kill villain london");
    assert_eq!(doc.count_pos(Pos::Propn), 1);
}

#[test]
fn recognises_people_and_dates() {
    let doc = LexiconAnnotator
        .annotate("We watched Bruce Wayne fall on 10 February 2006.")
        .unwrap();
    assert_eq!(doc.count_entities(EntityLabel::Person), 1);
    assert_eq!(doc.count_entities(EntityLabel::Date), 1);
    let person = doc
        .entities
        .iter()
        .find(|e| e.label == EntityLabel::Person)
        .unwrap();
    assert_eq!(person.text, "Bruce Wayne");
}

#[test]
fn lemmatizer_handles_regular_and_irregular_forms() {
    assert_eq!(lemmatize("villains", Pos::Noun), "villain");
    assert_eq!(lemmatize("stories", Pos::Noun), "story");
    assert_eq!(lemmatize("running", Pos::Verb), "run");
    assert_eq!(lemmatize("saw", Pos::Verb), "see");
    assert_eq!(lemmatize("was", Pos::Aux), "be");
}

#[test]
fn overlong_text_is_rejected() {
    let text = "a".repeat(MAX_TEXT_CHARS + 1);
    assert!(LexiconAnnotator.annotate(&text).is_err());
}

#[test]
fn empty_text_yields_empty_features() {
    let doc = LexiconAnnotator.annotate("").unwrap();
    assert_eq!(TextFeatures::from_doc(&doc), TextFeatures::default());
}
