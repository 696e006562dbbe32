pub mod eligibility;
pub mod emi;
