//! Integration tests for factory-built matrices
//!
//! Hand-built cases with literal expected values, exercising the object-safe
//! interface the way consumers do.

use anyhow::Result;
use latrec_sparse::{check_bounds, check_operand, Matrix, MatrixFactory, SparseError, ValueDomain};

fn matrix_3x2(domain: ValueDomain) -> Box<dyn Matrix> {
    // [ 1  2 ]
    // [ 0 -3 ]
    // [ 4  0 ]
    let mut m = MatrixFactory::new_matrix(3, 2, domain);
    m.set(0, 0, 1.0);
    m.set(0, 1, 2.0);
    m.set(1, 1, -3.0);
    m.set(2, 0, 4.0);
    m
}

#[test]
fn test_mult_3x2_against_literal() {
    let m = matrix_3x2(ValueDomain::Double);
    let out = m.mult(&[2.0, -1.0], None, 0.5);
    let expected = [0.0, 1.5, 4.0];
    for (got, want) in out.iter().zip(expected.iter()) {
        assert!((got - want).abs() < 1e-12, "{} vs {}", got, want);
    }

    let out_t = m.mult_t(&[1.0, 1.0, 1.0], None, 1.0);
    assert_eq!(out_t, vec![5.0, -1.0]);
}

#[test]
fn test_mult_accumulates_into_existing_output() {
    let m = matrix_3x2(ValueDomain::Short);
    let out = m.mult(&[1.0, 1.0], Some(vec![10.0, 10.0, 10.0]), 1.0);
    assert_eq!(out, vec![13.0, 7.0, 14.0]);
}

#[test]
fn test_nnz_after_scripted_writes() {
    let mut m = MatrixFactory::new_matrix(5, 5, ValueDomain::Float);
    let script = [
        (0, 0, 1.0),
        (1, 3, 2.0),
        (4, 4, 3.0),
        (0, 0, 5.0),
        (2, 1, 1.0),
        (3, 3, 1.0),
        (1, 3, -2.0),
        (4, 0, 1.0),
        (0, 4, 8.0),
    ];
    for &(i, j, x) in &script {
        m.set(i, j, x);
    }
    assert_eq!(m.nnz(), 7);
    assert_eq!(m.get(0, 0), 5.0);
    assert_eq!(m.get(1, 3), -2.0);
}

#[test]
fn test_descriptors_follow_shape_and_domain() {
    let m = MatrixFactory::new_matrix(200, 100, ValueDomain::Unweighted);
    assert_eq!(m.index_type(), "byte");
    assert_eq!(m.weight_type(), "boolean");

    let m = MatrixFactory::new_matrix(300, 100, ValueDomain::Unweighted);
    assert_eq!(m.index_type(), "char");
}

#[test]
fn test_row_and_column_enumeration() {
    let m = matrix_3x2(ValueDomain::Int);
    let row_sizes: Vec<usize> = m.get_rows().map(|r| r.nnz()).collect();
    let col_sizes: Vec<usize> = m.get_cols().map(|c| c.nnz()).collect();
    assert_eq!(row_sizes, vec![2, 1, 1]);
    assert_eq!(col_sizes, vec![2, 2]);
    assert_eq!(m.col(1).iter().collect::<Vec<_>>(), vec![(0, 2.0), (1, -3.0)]);
}

#[test]
fn test_cursor_downdate() {
    let mut m = matrix_3x2(ValueDomain::Double);
    let u = [1.0, 0.5, 2.0];
    let v = [1.0, -1.0];
    {
        let mut cursor = m.all();
        while let Some((i, j, value)) = cursor.next_entry() {
            cursor.set(value - u[i] * v[j]);
        }
    }
    assert_eq!(m.get(0, 0), 0.0);
    assert_eq!(m.get(0, 1), 3.0);
    assert_eq!(m.get(1, 1), -2.5);
    assert_eq!(m.get(2, 0), 2.0);
    assert_eq!(m.col(1).get(1), -2.5);
    // Unoccupied cells are not visited
    assert_eq!(m.get(1, 0), 0.0);
    assert_eq!(m.nnz(), 4);
}

#[test]
fn test_symmetric_downdate_rewrites_each_cell_once() -> Result<()> {
    // [ 2  1  0 ]
    // [ 1  0  3 ]
    // [ 0  3  1 ]
    let mut m = MatrixFactory::new_symmetric_checked(3, 3, "double".parse()?)?;
    m.set(0, 0, 2.0);
    m.set(0, 1, 1.0);
    m.set(1, 2, 3.0);
    m.set(2, 2, 1.0);

    let x = [1.0, 1.0, 2.0];
    {
        let mut cursor = m.all();
        while let Some((i, j, value)) = cursor.next_entry() {
            cursor.set(value - x[i] * x[j]);
        }
    }
    assert_eq!(m.get(0, 0), 1.0);
    assert_eq!(m.get(0, 1), 0.0);
    assert_eq!(m.get(1, 0), 0.0);
    assert_eq!(m.get(1, 2), 1.0);
    assert_eq!(m.get(2, 1), 1.0);
    assert_eq!(m.get(2, 2), -3.0);
    assert_eq!(m.nnz(), 6);
    Ok(())
}

#[test]
fn test_named_domain_and_operand_checks() -> Result<()> {
    let mut m = MatrixFactory::new_matrix_named(4, 3, "short")?;
    m.set(3, 2, 7.0);
    check_operand(m.as_ref(), 3, false)?;
    check_operand(m.as_ref(), 4, true)?;
    assert_eq!(m.mult(&[0.0, 0.0, 1.0], None, 1.0), vec![0.0, 0.0, 0.0, 7.0]);
    assert!(check_operand(m.as_ref(), 4, false).is_err());
    Ok(())
}

#[test]
fn test_bounds_are_checked_on_request() {
    let m = matrix_3x2(ValueDomain::Byte);
    assert_eq!(
        check_bounds(m.as_ref(), 1, 2),
        Err(SparseError::OutOfBounds {
            row: 1,
            col: 2,
            rows: 3,
            cols: 2
        })
    );
}
