pub mod duration;
pub mod providers;
pub mod recipes;

pub use recipes::RecipeService;
