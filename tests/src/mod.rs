#[cfg(test)]
pub mod marketplace_flow_tests;
#[cfg(test)]
pub mod pagination_tests;
#[cfg(test)]
pub mod store_tests;
