//! Edge case tests for pseudoc-lex
