mod gateway_tests;
