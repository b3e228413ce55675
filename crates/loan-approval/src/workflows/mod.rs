pub mod loan_approval;
