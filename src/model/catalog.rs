use serde_json::{Map, Value};

/// Um catálogo é o documento JSON inteiro de um idioma: chave -> texto,
/// com um nível de aninhamento no caso comum (objetos viram grupos).
/// A ordem das chaves é a ordem do autor e é preservada no disco.
pub type Catalog = Map<String, Value>;
