//! Edge case tests for pseudoc-par

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::{parse, ParseError};
    use pseudoc_lex::lex;

    fn parse_source(source: &str) -> Result<Program, ParseError> {
        parse(lex(source).expect("lexing failed"))
    }

    fn parse_ok(source: &str) -> Program {
        parse_source(source).expect("program must parse")
    }

    // ==================== STATEMENTS ====================

    #[test]
    fn test_empty_program() {
        assert!(parse_ok("").is_empty());
        assert!(parse_ok("// comments only\n").is_empty());
    }

    #[test]
    fn test_declare_scalars() {
        let program = parse_ok("DECLARE n : INTEGER\nDECLARE s : STRING");
        assert_eq!(
            program[0],
            Stmt::Declare(Declare {
                name: "n".to_string(),
                ty: TypeSpec::Scalar(ScalarType::Integer),
            })
        );
        assert_eq!(
            program[1],
            Stmt::Declare(Declare {
                name: "s".to_string(),
                ty: TypeSpec::Scalar(ScalarType::String),
            })
        );
    }

    #[test]
    fn test_declare_array_two_dimensions() {
        let program = parse_ok("DECLARE B : ARRAY[1:3, 1:3] OF INTEGER");
        match &program[0] {
            Stmt::Declare(Declare {
                ty: TypeSpec::Array {
                    lowers,
                    uppers,
                    base,
                },
                ..
            }) => {
                assert_eq!(lowers, &[1, 1]);
                assert_eq!(uppers, &[3, 3]);
                assert_eq!(**base, TypeSpec::Scalar(ScalarType::Integer));
            }
            other => panic!("expected array declaration, got {other:?}"),
        }
    }

    #[test]
    fn test_declare_inline_pointer() {
        let program = parse_ok("DECLARE p : ^INTEGER");
        assert_eq!(
            program[0],
            Stmt::Declare(Declare {
                name: "p".to_string(),
                ty: TypeSpec::Pointer(ScalarType::Integer),
            })
        );
    }

    #[test]
    fn test_assignment_targets() {
        let program = parse_ok("x <- 1\ns.name <- \"a\"\nA[1, 2] <- 3\np^ <- 4");
        assert!(matches!(&program[0], Stmt::Assign(a) if a.target == Expr::Var("x".to_string())));
        assert!(matches!(
            &program[1],
            Stmt::Assign(a) if matches!(a.target, Expr::FieldAccess { .. })
        ));
        assert!(matches!(
            &program[2],
            Stmt::Assign(a) if matches!(a.target, Expr::ArrayAccess { .. })
        ));
        assert!(matches!(
            &program[3],
            Stmt::Assign(a) if matches!(a.target, Expr::Dereference(_))
        ));
    }

    #[test]
    fn test_if_with_else() {
        let program = parse_ok("IF x > 0 THEN\nOUTPUT 1\nELSE\nOUTPUT 2\nENDIF");
        match &program[0] {
            Stmt::If(stmt) => {
                assert_eq!(stmt.then_body.len(), 1);
                assert_eq!(stmt.else_body.as_ref().map(Vec::len), Some(1));
            }
            other => panic!("expected IF, got {other:?}"),
        }
    }

    #[test]
    fn test_if_without_else() {
        let program = parse_ok("IF x > 0 THEN\nOUTPUT 1\nENDIF");
        assert!(matches!(&program[0], Stmt::If(stmt) if stmt.else_body.is_none()));
    }

    #[test]
    fn test_while_loop() {
        let program = parse_ok("WHILE x < 3\nOUTPUT x\nx <- x + 1\nENDWHILE");
        assert!(matches!(&program[0], Stmt::While(stmt) if stmt.body.len() == 2));
    }

    #[test]
    fn test_for_loop() {
        let program = parse_ok("FOR i <- 1 TO 10\nOUTPUT i\nNEXT i");
        match &program[0] {
            Stmt::For(stmt) => {
                assert_eq!(stmt.var, "i");
                assert_eq!(stmt.body.len(), 1);
            }
            other => panic!("expected FOR, got {other:?}"),
        }
    }

    #[test]
    fn test_repeat_until() {
        let program = parse_ok("REPEAT\nx <- x + 1\nUNTIL x > 3");
        assert!(matches!(&program[0], Stmt::RepeatUntil(stmt) if stmt.body.len() == 1));
    }

    #[test]
    fn test_case_of_with_otherwise() {
        let program = parse_ok("CASE OF x\n1 : OUTPUT \"one\"\n2 : OUTPUT \"two\"\nOTHERWISE\nOUTPUT \"many\"\nENDCASE");
        match &program[0] {
            Stmt::CaseOf(stmt) => {
                assert_eq!(stmt.arms.len(), 2);
                assert_eq!(stmt.arms[0].0, Expr::Number("1".to_string()));
                assert!(stmt.otherwise.is_some());
            }
            other => panic!("expected CASE OF, got {other:?}"),
        }
    }

    #[test]
    fn test_case_arm_with_multiple_statements() {
        let program = parse_ok("CASE OF x\n1 : OUTPUT 1\nOUTPUT 2\n2 : OUTPUT 3\nENDCASE");
        match &program[0] {
            Stmt::CaseOf(stmt) => {
                assert_eq!(stmt.arms[0].1.len(), 2);
                assert_eq!(stmt.arms[1].1.len(), 1);
                assert!(stmt.otherwise.is_none());
            }
            other => panic!("expected CASE OF, got {other:?}"),
        }
    }

    #[test]
    fn test_output_multiple_values() {
        let program = parse_ok("OUTPUT 1, \"and\", x");
        assert!(matches!(&program[0], Stmt::Output(values) if values.len() == 3));
    }

    #[test]
    fn test_output_empty_line() {
        let program = parse_ok("OUTPUT\nOUTPUT 1");
        assert!(matches!(&program[0], Stmt::Output(values) if values.is_empty()));
    }

    #[test]
    fn test_input_statement() {
        let program = parse_ok("INPUT age");
        assert_eq!(program[0], Stmt::Input("age".to_string()));
    }

    // ==================== DEFINITIONS ====================

    #[test]
    fn test_record_type_definition() {
        let program = parse_ok(
            "TYPE Student\nDECLARE name : STRING\nDECLARE age : INTEGER\nENDTYPE\nDECLARE s : Student",
        );
        match &program[0] {
            Stmt::TypeDef(def) => {
                assert_eq!(def.name, "Student");
                match &def.body {
                    TypeDefBody::Record(fields) => {
                        assert_eq!(fields.len(), 2);
                        assert_eq!(fields[0].0, "name");
                    }
                    other => panic!("expected record body, got {other:?}"),
                }
            }
            other => panic!("expected TYPE, got {other:?}"),
        }
        // the freshly registered name is usable as a declaration type
        assert!(matches!(
            &program[1],
            Stmt::Declare(d) if d.ty == TypeSpec::Named("Student".to_string())
        ));
    }

    #[test]
    fn test_pointer_alias_definition() {
        let program = parse_ok("TYPE IntPtr = ^INTEGER\nDECLARE p : IntPtr");
        assert_eq!(
            program[0],
            Stmt::TypeDef(TypeDef {
                name: "IntPtr".to_string(),
                body: TypeDefBody::PointerAlias(ScalarType::Integer),
            })
        );
    }

    #[test]
    fn test_procedure_definition_no_params() {
        let program = parse_ok("PROCEDURE Greet\nOUTPUT \"hi\"\nENDPROCEDURE");
        match &program[0] {
            Stmt::ProcedureDef(def) => {
                assert_eq!(def.name, "Greet");
                assert!(def.params.is_empty());
            }
            other => panic!("expected PROCEDURE, got {other:?}"),
        }
    }

    #[test]
    fn test_function_definition_with_params() {
        let program =
            parse_ok("FUNCTION Add(a : INTEGER, b : INTEGER) RETURNS INTEGER\nRETURN a + b\nENDFUNCTION");
        match &program[0] {
            Stmt::FunctionDef(def) => {
                assert_eq!(def.params.len(), 2);
                assert_eq!(def.return_type, TypeSpec::Scalar(ScalarType::Integer));
                assert!(!def.params[0].byref);
            }
            other => panic!("expected FUNCTION, got {other:?}"),
        }
    }

    #[test]
    fn test_byref_parameter_mode() {
        let program = parse_ok(
            "PROCEDURE Bump(BYREF n : INTEGER, BYVAL step : INTEGER)\nn <- n + step\nENDPROCEDURE",
        );
        match &program[0] {
            Stmt::ProcedureDef(def) => {
                assert!(def.params[0].byref);
                assert_eq!(def.params[0].name, "n");
                assert!(!def.params[1].byref);
                assert_eq!(def.params[1].name, "step");
            }
            other => panic!("expected PROCEDURE, got {other:?}"),
        }
    }

    #[test]
    fn test_parameter_named_byref() {
        // BYREF is contextual: alone before the colon it is the name
        let program = parse_ok("PROCEDURE P(BYREF : INTEGER)\nOUTPUT BYREF\nENDPROCEDURE");
        match &program[0] {
            Stmt::ProcedureDef(def) => {
                assert_eq!(def.params[0].name, "BYREF");
                assert!(!def.params[0].byref);
            }
            other => panic!("expected PROCEDURE, got {other:?}"),
        }
    }

    #[test]
    fn test_call_statement_forms() {
        let program = parse_ok("CALL Greet\nCALL Add(1, 2)");
        assert!(matches!(&program[0], Stmt::CallStmt(c) if c.args.is_empty()));
        assert!(matches!(&program[1], Stmt::CallStmt(c) if c.args.len() == 2));
    }

    #[test]
    fn test_return_with_and_without_value() {
        let program = parse_ok("FUNCTION F RETURNS INTEGER\nRETURN 1\nENDFUNCTION\nPROCEDURE P\nRETURN\nENDPROCEDURE");
        match &program[0] {
            Stmt::FunctionDef(def) => {
                assert!(matches!(&def.body[0], Stmt::Return(Some(_))));
            }
            other => panic!("expected FUNCTION, got {other:?}"),
        }
        match &program[1] {
            Stmt::ProcedureDef(def) => {
                assert!(matches!(&def.body[0], Stmt::Return(None)));
            }
            other => panic!("expected PROCEDURE, got {other:?}"),
        }
    }

    // ==================== ERRORS ====================

    #[test]
    fn test_unterminated_if_is_error() {
        let err = parse_source("IF x > 0 THEN\nOUTPUT 1").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { ref expected } if expected.contains("ENDIF")));
    }

    #[test]
    fn test_unterminated_while_is_error() {
        let err = parse_source("WHILE x < 3\nOUTPUT x").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { ref expected } if expected.contains("ENDWHILE")));
    }

    #[test]
    fn test_missing_then_is_error() {
        let err = parse_source("IF x > 0\nOUTPUT 1\nENDIF").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_next_variable_mismatch_is_error() {
        let err = parse_source("FOR i <- 1 TO 3\nOUTPUT i\nNEXT j").unwrap_err();
        assert!(matches!(
            err,
            ParseError::LoopVariableMismatch { ref expected, ref found, .. }
                if expected == "i" && found == "j"
        ));
    }

    #[test]
    fn test_unknown_type_is_error() {
        let err = parse_source("DECLARE s : Student").unwrap_err();
        assert!(matches!(err, ParseError::UnknownType { ref name, .. } if name == "Student"));
    }

    #[test]
    fn test_string_case_label_is_error() {
        let err = parse_source("CASE OF x\n\"one\" : OUTPUT 1\nENDCASE").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_statement_starting_with_number_is_error() {
        assert!(parse_source("42").is_err());
    }

    #[test]
    fn test_assignment_without_arrow_is_error() {
        assert!(parse_source("x 1").is_err());
    }

    #[test]
    fn test_pointer_to_user_type_is_error() {
        // pointer bases are restricted to scalars
        let err = parse_source("TYPE T\nDECLARE v : INTEGER\nENDTYPE\nDECLARE p : ^T").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_declared_before_use_of_type_name() {
        // a type name is unknown before its definition
        assert!(parse_source("DECLARE s : Student\nTYPE Student\nDECLARE x : INTEGER\nENDTYPE").is_err());
    }
}
