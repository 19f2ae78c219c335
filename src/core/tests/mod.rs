mod connectivity_tests;
mod wire_model_tests;
