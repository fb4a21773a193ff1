pub mod code_generator;
pub mod daily;
pub mod names;
pub mod normalize;
pub mod resolver;
pub mod sampler;
pub mod time;

pub use code_generator::{generate_code, generate_unique_code, is_valid_code};
pub use daily::{DailySelector, daily_seed_material, unique_non_empty};
pub use names::{parse_count, parse_name_tokens, parse_names_and_count};
pub use normalize::{normalize, normalize_opt};
pub use resolver::{ResolvePolicy, RowMatch, resolve_row};
pub use sampler::{SampleMode, roll_die, sample_without_replacement};
pub use time::{format_timestamp, kst_now, kst_today};
