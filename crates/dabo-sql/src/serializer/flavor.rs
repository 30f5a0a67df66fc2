use super::Serializer;

use dabo_core::driver::Capability;

impl Serializer<'static> {
    pub fn sqlite() -> Serializer<'static> {
        Serializer::new(&Capability::SQLITE)
    }

    pub fn postgresql() -> Serializer<'static> {
        Serializer::new(&Capability::POSTGRESQL)
    }

    pub fn mysql() -> Serializer<'static> {
        Serializer::new(&Capability::MYSQL)
    }
}
