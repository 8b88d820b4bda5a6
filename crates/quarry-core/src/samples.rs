//! Built-in sample batch for populating an empty corpus.

use crate::models::IndexDocument;

const SAMPLES: [(&str, &str); 5] = [
    (
        "1",
        "Artificial Intelligence (AI) is a branch of computer science that aims to create \
         intelligent machines that work and react like humans. AI systems can perform tasks \
         such as learning, reasoning, problem-solving, perception, and language understanding.",
    ),
    (
        "2",
        "Machine Learning is a subset of AI that enables computers to learn and improve from \
         experience without being explicitly programmed. It uses algorithms to analyze data, \
         identify patterns, and make predictions or decisions.",
    ),
    (
        "3",
        "Natural Language Processing (NLP) is a field of AI that focuses on the interaction \
         between computers and human language. It enables machines to read, understand, and \
         derive meaning from human language in a valuable way.",
    ),
    (
        "4",
        "Deep Learning is a machine learning technique inspired by the human brain's neural \
         networks. It uses artificial neural networks with multiple layers to model and \
         understand complex patterns in data.",
    ),
    (
        "5",
        "Computer Vision is an AI field that trains computers to interpret and understand \
         visual information from the world. It enables machines to identify objects, faces, \
         text, and scenes in images and videos.",
    ),
];

/// The five sample documents submitted by "index samples".
pub fn sample_documents() -> Vec<IndexDocument> {
    SAMPLES
        .iter()
        .map(|(id, content)| IndexDocument::new(*id, *content))
        .collect()
}
