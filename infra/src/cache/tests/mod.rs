mod redis_engine_tests;
