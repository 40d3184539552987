mod arbitrary;

mod property_json;
mod property_lines;
