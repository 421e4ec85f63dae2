mod memory_store_test;
