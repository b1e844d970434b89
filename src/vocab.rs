//! DBpedia vocabulary used by the graph store connectors.

pub const DBP: &str = "http://dbpedia.org/property/";
pub const DBO: &str = "http://dbpedia.org/ontology/";
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const DCT: &str = "http://purl.org/dc/terms/";
pub const FOAF: &str = "http://xmlns.com/foaf/0.1/";

pub const INGREDIENTS: &str = "http://dbpedia.org/property/ingredients";
pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
pub const DESCRIPTION: &str = "http://dbpedia.org/ontology/description";
pub const PREP: &str = "http://dbpedia.org/property/prep";
pub const SERVED: &str = "http://dbpedia.org/property/served";
pub const GARNISH: &str = "http://dbpedia.org/property/garnish";
pub const SOURCE_LINK: &str = "http://dbpedia.org/property/sourcelink";
pub const SUBJECT: &str = "http://purl.org/dc/terms/subject";
pub const DEPICTION: &str = "http://xmlns.com/foaf/0.1/depiction";
