mod compare_and_set_test;
mod enumerate_test;
mod touch_test;
