use crate::entity::LendingPolicy;

pub trait DependOnLendingPolicy: 'static + Sync + Send {
    fn lending_policy(&self) -> &LendingPolicy;
}
