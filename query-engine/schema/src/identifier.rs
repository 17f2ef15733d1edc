/// Name of a type in the generated schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    name: String,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Identifier { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interface(base_name: &str) -> Self {
        Identifier::new(format!("{base_name}Interface"))
    }

    pub fn connection(base_name: &str) -> Self {
        Identifier::new(format!("{base_name}Connection"))
    }

    pub fn edge(base_name: &str) -> Self {
        Identifier::new(format!("{base_name}Edge"))
    }

    pub fn filter(base_name: &str) -> Self {
        Identifier::new(format!("FilterFor{base_name}"))
    }

    pub fn order_enum(base_name: &str) -> Self {
        Identifier::new(format!("PossibleOrderFor{base_name}"))
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
