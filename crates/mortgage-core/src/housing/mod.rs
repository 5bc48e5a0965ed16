pub mod property_tax;
pub mod rent_vs_buy;
