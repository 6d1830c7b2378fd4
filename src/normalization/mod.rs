pub mod glossary_key;
pub mod value;
