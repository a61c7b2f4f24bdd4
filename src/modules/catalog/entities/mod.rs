pub mod catalog_item;
