pub mod docstore;
