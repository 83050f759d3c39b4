use common::comp::SoldierId;

#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// An admin command named a soldier that does not exist.
    UnknownSoldier(SoldierId),
}
