pub mod fetch_slot;
pub mod portfolio_result;
pub mod presentation;
pub mod ranked_list;
pub mod view_preference;
pub mod wizard;
